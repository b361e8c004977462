#[derive(Copy, Clone, Debug, PartialEq, Display)]
pub enum Error {
    #[display(fmt = "no such file")]
    NotFound,
    #[display(fmt = "too many open files")]
    InsufficentResource,
    #[display(fmt = "permission denied")]
    PermissionDenied,
    #[display(fmt = "file content is not utf-8")]
    InvalidData,
    #[display(fmt = "bad file descriptor")]
    Generic,
}
