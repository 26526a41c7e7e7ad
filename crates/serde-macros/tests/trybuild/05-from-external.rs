#[allow(unused_imports)]
#[allow(unused_variables)]

use telemetryd_serde_macros::LocatedError;
use telemetryd_parse_utils::{LocatedParsingError, Span};

use nom::{error::ErrorKind, number::complete::be_u16, IResult};


#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct InvalidSetId(pub u16);

#[derive(LocatedError, Eq, PartialEq, Debug, Clone)]
pub enum SetHeaderError {
    NomError(#[from_nom] ErrorKind),
    InvalidSetId(#[from_external] InvalidSetId),
}

fn parse(buf: Span<'_>) -> IResult<Span<'_>, u16, LocatedSetHeaderError<'_>> {
    nom::combinator::map_res(be_u16, |id| {
        if id < 256 && id != 2 && id != 3 {
            Err(InvalidSetId(id))
        } else {
            Ok(id)
        }
    })(buf)
}

fn main() {
    let buf = [0u8, 7];
    let parsed = parse(Span::new(&buf));
    match parsed {
        Err(nom::Err::Error(err)) => {
            assert_eq!(err.error(), &SetHeaderError::InvalidSetId(InvalidSetId(7)));
        }
        other => panic!("unexpected {other:?}"),
    }
    let buf = [1u8, 0];
    assert_eq!(parse(Span::new(&buf)).map(|(_, id)| id), Ok(256));
}
