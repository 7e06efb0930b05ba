use paperqr_pages::{encode_frames, frame, reassemble, CborCodec, MAX_FRAME_BYTES, MAX_PAGE_COUNT};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

#[divan::bench(args = [1024, 65536, 500000])]
fn bench_frame(bencher: divan::Bencher, size: usize) {
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| frame(&[0u8; 16], divan::black_box(data.clone()), MAX_PAGE_COUNT).unwrap());
}

#[divan::bench(args = [1024, 65536, 500000])]
fn bench_encode_frames(bencher: divan::Bencher, size: usize) {
    let records = frame(&[0u8; 16], make_data(size), MAX_PAGE_COUNT).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| encode_frames(&CborCodec, divan::black_box(&records), MAX_FRAME_BYTES).unwrap());
}

#[divan::bench(args = [1024, 65536, 500000])]
fn bench_reassemble(bencher: divan::Bencher, size: usize) {
    let mut records = frame(&[0u8; 16], make_data(size), MAX_PAGE_COUNT).unwrap();
    records.reverse();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| reassemble(divan::black_box(records.clone())).unwrap());
}

fn main() {
    divan::main();
}
