//! The error type shared by the core and the backends.

/// An error raised while constructing, defining or driving a custom element.
#[derive(Debug)]
pub enum Error {
    /// The host runtime failed.
    BackendError {
        msg: String,
        err: Option<Box<dyn std::error::Error>>,
    },
    /// The tag name is already registered.
    AlreadyDefined(String),
    /// The tag name is not a valid custom element name.
    InvalidTagName(String),
    /// The event type cannot be dispatched.
    InvalidEventType(String),
    /// The attribute name is not accepted by the host.
    InvalidAttributeName(String),
    /// A shadow root has already been attached to the element.
    ShadowRootExists,
    /// A method declared in `bound_methods` was not bound during construction.
    MethodNotBound(String),
    /// A method was bound without being declared in `bound_methods`.
    UndeclaredMethod(String),
    /// The property is not declared in `mirrored_props`.
    PropertyNotMirrored(String),
    /// A definition could not be loaded.
    ConfigError(String),
}

impl Error {
    /// Wrap a host message as a `BackendError` .
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::BackendError {
            msg: msg.into(),
            err: None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::BackendError { msg, err } => {
                write!(f, "{}", msg)?;
                if let Some(err) = err {
                    write!(f, " ({})", err)?;
                }
            }
            Error::AlreadyDefined(tag) => {
                write!(f, "The tag name {:?} has already been defined", tag)?;
            }
            Error::InvalidTagName(tag) => {
                write!(f, "{:?} is not a valid custom element name", tag)?;
            }
            Error::InvalidEventType(ty) => {
                write!(f, "{:?} is not a valid event type", ty)?;
            }
            Error::InvalidAttributeName(name) => {
                write!(f, "{:?} is not a valid attribute name", name)?;
            }
            Error::ShadowRootExists => {
                write!(f, "The element already has a shadow root")?;
            }
            Error::MethodNotBound(name) => {
                write!(f, "The method {:?} is declared as bound but never bound", name)?;
            }
            Error::UndeclaredMethod(name) => {
                write!(f, "The method {:?} is bound but not declared", name)?;
            }
            Error::PropertyNotMirrored(name) => {
                write!(f, "The property {:?} is not mirrored", name)?;
            }
            Error::ConfigError(msg) => {
                write!(f, "Illegal element definition: {}", msg)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for Error {}
