#[allow(unused_imports)]
#[allow(unused_variables)]

use telemetryd_serde_macros::LocatedError;
use telemetryd_parse_utils::{LocatedParsingError, Span};


#[derive(LocatedError, Eq, PartialEq, Debug, Clone)]
pub enum TestError {
    A,
    B,
}

fn main() {
    let buf = [0u8, 1, 2];
    let span = Span::new(&buf);
    let error = TestError::A;
    let located = LocatedTestError::new(span, error.clone());
    assert_eq!(located.span(), &span);
    assert_eq!(located.error(), &error);
    assert_eq!(located.location_offset(), 0);
}
