use paperqr_crypto::{build_aead, decrypt, encrypt, Key};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt(bencher: divan::Bencher, size: usize) {
    let cipher = build_aead(&Key::from_bytes([0xAB; 32])).unwrap();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| encrypt(divan::black_box(&cipher), divan::black_box(&data)).unwrap());
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_decrypt(bencher: divan::Bencher, size: usize) {
    let cipher = build_aead(&Key::from_bytes([0xAB; 32])).unwrap();
    let data = make_data(size);
    let blob = encrypt(&cipher, &data).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| decrypt(divan::black_box(&cipher), divan::black_box(&blob)).unwrap());
}

fn main() {
    divan::main();
}
