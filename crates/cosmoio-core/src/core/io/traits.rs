use super::args::{IoArgs, IoMode};
use super::error::IoError;
use crate::core::models::class::CosmologyClass;
use crate::core::models::cosmology::Cosmology;

/// Decodes a cosmology for one registered format.
///
/// Implementors interpret the call arguments themselves: the registry hands
/// over exactly what the caller passed.
pub trait FormatReader: Send + Sync {
    /// Reads a cosmology of `class` (or one of its subclasses).
    ///
    /// # Arguments
    ///
    /// * `class` - The class the caller asked for; the registry checks the result against it.
    /// * `args` - The caller's arguments, untouched.
    ///
    /// # Return
    ///
    /// Returns the decoded cosmology.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are not understood by the format,
    /// the source cannot be accessed, or its contents do not describe a valid
    /// cosmology.
    fn read(&self, class: CosmologyClass, args: &IoArgs) -> Result<Cosmology, IoError>;
}

/// Encodes a cosmology for one registered format.
///
/// Writers are looked up by the class of the instance, so a writer registered
/// for `Cosmology` serves every class.
pub trait FormatWriter: Send + Sync {
    /// Writes `cosmology` to the destination named by `args`.
    ///
    /// # Arguments
    ///
    /// * `cosmology` - The instance bound to the write call.
    /// * `args` - The caller's arguments, untouched.
    ///
    /// # Return
    ///
    /// Returns `Ok(())` once the destination holds the encoded cosmology.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are not understood by the format or
    /// the destination cannot be written.
    fn write(&self, cosmology: &Cosmology, args: &IoArgs) -> Result<(), IoError>;
}

/// Decides whether a format can handle a call that did not name one.
///
/// Identifiers must be cheap and side-effect free; the registry may run every
/// identifier registered for a class on each call.
pub trait FormatIdentifier: Send + Sync {
    /// Returns `true` if this format recognises the call described by `mode` and `args`.
    fn identify(&self, mode: IoMode, args: &IoArgs) -> bool;
}

impl<F> FormatIdentifier for F
where
    F: Fn(IoMode, &IoArgs) -> bool + Send + Sync,
{
    fn identify(&self, mode: IoMode, args: &IoArgs) -> bool {
        self(mode, args)
    }
}
