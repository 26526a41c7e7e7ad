#[allow(unused_imports)]
#[allow(unused_variables)]

use telemetryd_serde_macros::WritingError;

#[derive(WritingError, Eq, PartialEq, Clone, Debug)]
pub enum FieldWritingError {
    StdIOError(#[from_std_io_error] String),
}

#[derive(WritingError, Eq, PartialEq, Clone, Debug)]
pub enum RecordWritingError {
    StdIOError(#[from_std_io_error] String),
    FieldError(#[from] FieldWritingError),
}

fn write_field() -> Result<(), FieldWritingError> {
    let written: Result<(), std::io::Error> =
        Err(std::io::Error::new(std::io::ErrorKind::WriteZero, "full"));
    written?;
    Ok(())
}

fn write_record() -> Result<(), RecordWritingError> {
    write_field()?;
    Ok(())
}

fn main() {
    assert_eq!(
        write_record(),
        Err(RecordWritingError::FieldError(FieldWritingError::StdIOError("full".to_string())))
    );
}
