use trellis_derive::trellis_error;

#[trellis_error]
pub enum DemoError {
    #[error("I/O failure: {source}")]
    Io { source: std::io::Error },
}

fn main() {}
