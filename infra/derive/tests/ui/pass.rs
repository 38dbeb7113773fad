use std::borrow::Cow;
use trellis_derive::trellis_error;

#[trellis_error]
pub enum DemoError {
    #[error("Unknown flag{}: {entry}", format_context(.context))]
    UnknownFlag { entry: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("I/O failure{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },
}

fn main() {
    let err = DemoError::UnknownFlag { entry: "NOPE".into(), context: None };
    assert_eq!(err.kind(), "UnknownFlag");
    assert_eq!(err.entry(), Some("NOPE"));

    let io: Result<(), std::io::Error> = Err(std::io::Error::other("boom"));
    let err = io.context("reading settings").unwrap_err();
    assert_eq!(err.kind(), "Io");
    assert!(err.entry().is_none());
}
