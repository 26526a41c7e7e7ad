#[allow(unused_imports)]
#[allow(unused_variables)]

use telemetryd_serde_macros::LocatedError;
use telemetryd_parse_utils::Span;

use nom::{error::ErrorKind, IResult};


#[derive(LocatedError, Eq, PartialEq, Debug, Clone)]
pub enum SetError {
    NomError(#[from_nom] ErrorKind),
    Record(#[from_located] RecordError),
}

#[derive(LocatedError, Eq, PartialEq, Debug, Clone)]
pub enum RecordError {
    Invalid,
}

fn parse_record(buf: Span<'_>) -> IResult<Span<'_>, u8, LocatedRecordError<'_>> {
    Err(nom::Err::Error(LocatedRecordError::new(buf, RecordError::Invalid)))
}

fn parse(buf: Span<'_>) -> IResult<Span<'_>, u8, LocatedSetError<'_>> {
    let (buf, value) = parse_record(buf).map_err(|err| err.map(LocatedSetError::from))?;
    Ok((buf, value))
}

fn main() {
    let buf = [1u8];
    let span = Span::new(&buf);
    let parsed = parse(span);
    assert_eq!(
        parsed,
        Err(nom::Err::Error(LocatedSetError::new(span, SetError::Record(RecordError::Invalid))))
    );
}
