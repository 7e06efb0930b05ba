use thiserror::Error;

pub type PageResult<T> = Result<T, PageError>;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("payload needs {count} pages, but the header can describe at most {max}")]
    TooManyPages { count: usize, max: usize },

    #[error("{count} pages required, more than the configured maximum of {max}")]
    OutputLimitExceeded { count: usize, max: usize },

    #[error("page {0} is missing")]
    MissingPage(usize),

    #[error("header with salt and page count not found on page 1")]
    MissingHeader,

    #[error("page {page} carries a header, only page 1 may")]
    UnexpectedHeader { page: usize },

    #[error("salt in header is {len} bytes, but salt must be {expected} bytes")]
    InvalidSaltLength { len: usize, expected: usize },

    #[error("{found} pages supplied, but the header declares {declared}")]
    PageCountMismatch { declared: usize, found: usize },

    #[error("frame budget of {budget} bytes leaves no room for data (overhead {overhead})")]
    FrameBudget { budget: usize, overhead: usize },

    #[error("page {page} encodes to {len} bytes, over the {budget}-byte frame budget")]
    FrameTooLarge { page: usize, len: usize, budget: usize },

    #[error("frame codec: {0}")]
    Codec(String),

    #[error("failed to scan page image {name:?}: {reason}")]
    Scan { name: String, reason: String },

    #[error("scan worker pool: {0}")]
    WorkerPool(String),
}
