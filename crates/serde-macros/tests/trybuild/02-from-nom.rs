#[allow(unused_imports)]
#[allow(unused_variables)]

use telemetryd_serde_macros::LocatedError;
use telemetryd_parse_utils::{LocatedParsingError, Span};

use nom::{error::ErrorKind, number::complete::be_u32, IResult};


#[derive(LocatedError, Eq, PartialEq, Debug, Clone)]
pub enum HeaderError {
    NomError(#[from_nom] ErrorKind),
}

fn parse(buf: Span<'_>) -> IResult<Span<'_>, u32, LocatedHeaderError<'_>> {
    let (buf, _) = nom::bytes::complete::take::<usize, Span<'_>, LocatedHeaderError<'_>>(2)(buf)?;
    be_u32(buf)
}

fn main() {
    let buf = [0u8, 1, 2, 3];
    let parsed = parse(Span::new(&buf));
    match parsed {
        Err(nom::Err::Error(err)) => {
            assert_eq!(err.error(), &HeaderError::NomError(ErrorKind::Eof));
            assert_eq!(err.location_offset(), 2);
        }
        other => panic!("unexpected {other:?}"),
    }
}
