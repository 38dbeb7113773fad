use trellis_derive::trellis_error;

#[trellis_error]
pub enum DemoError {
    #[error("I/O failure: {0}")]
    Io(std::io::Error),
}

fn main() {}
