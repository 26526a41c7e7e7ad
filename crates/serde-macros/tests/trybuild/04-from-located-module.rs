#[allow(unused_imports)]
#[allow(unused_variables)]

use telemetryd_serde_macros::LocatedError;
use telemetryd_parse_utils::Span;

use nom::error::ErrorKind;

mod fields {
    use telemetryd_serde_macros::LocatedError;

    #[derive(LocatedError, Eq, PartialEq, Debug, Clone)]
    pub enum FieldError {
        NomError(#[from_nom] nom::error::ErrorKind),
    }
}

mod lists {
    use telemetryd_serde_macros::LocatedError;

    #[derive(LocatedError, Eq, PartialEq, Debug, Clone)]
    pub enum ListError {
        InvalidSemantic(u8),
    }
}

use lists::ListError;

#[derive(LocatedError, Eq, PartialEq, Debug, Clone)]
pub enum RecordError {
    NomError(#[from_nom] ErrorKind),
    ByPath(#[from_located] fields::FieldError),
    ByModule(#[from_located(module = "lists")] ListError),
}

fn main() {
    let buf = [1u8, 2];
    let span = Span::new(&buf);
    let inner = fields::LocatedFieldError::new(span, fields::FieldError::NomError(ErrorKind::Eof));
    let outer: LocatedRecordError<'_> = inner.into();
    assert_eq!(
        outer,
        LocatedRecordError::new(
            span,
            RecordError::ByPath(fields::FieldError::NomError(ErrorKind::Eof))
        )
    );
    let inner = lists::LocatedListError::new(span, ListError::InvalidSemantic(9));
    let outer: LocatedRecordError<'_> = inner.into();
    assert_eq!(
        outer,
        LocatedRecordError::new(span, RecordError::ByModule(ListError::InvalidSemantic(9)))
    );
}
