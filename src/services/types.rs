use crate::errors::Error;

pub type ServiceResult<T> = Result<T, Error>;
