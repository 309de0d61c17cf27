//! Read/write entry points binding [`Cosmology`] to the unified I/O registry.
//!
//! Adapters are created per call with [`make_reader`] / [`make_writer`] (or the
//! accessor sugar [`CosmologyClass::read`] / [`Cosmology::write`]), hold only the
//! bound class, instance and operation kind, and forward their arguments to the
//! registry untouched.
//!
//! ```ignore
//! let registry = UnifiedIoRegistry::with_builtin_formats()?;
//! let planck = CosmologyClass::Cosmology
//!     .read(&registry)
//!     .into_result()?
//!     .call(IoArgs::path("planck18.toml"))?;
//! planck
//!     .write(&registry)
//!     .call(IoArgs::path("planck18.json").with_format("json"))?;
//! ```

use super::args::{IoArgs, IoMode};
use super::error::IoError;
use super::registry::{FormatInfo, UnifiedIoRegistry};
use crate::core::models::class::CosmologyClass;
use crate::core::models::cosmology::Cosmology;
use tracing::warn;

/// Why a read adapter could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsupported {
    pub class: CosmologyClass,
    pub reason: &'static str,
}

impl From<Unsupported> for IoError {
    fn from(unsupported: Unsupported) -> Self {
        IoError::NotImplemented {
            class: unsupported.class,
        }
    }
}

/// Outcome of constructing a read adapter.
pub enum ReadAccess<'r> {
    Supported(CosmologyRead<'r>),
    Unsupported(Unsupported),
}

impl<'r> ReadAccess<'r> {
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported(_))
    }

    /// Converts the unsupported case into [`IoError::NotImplemented`].
    pub fn into_result(self) -> Result<CosmologyRead<'r>, IoError> {
        match self {
            Self::Supported(reader) => Ok(reader),
            Self::Unsupported(unsupported) => Err(unsupported.into()),
        }
    }
}

const SUBCLASS_READ_WARNING: &str =
    "`Cosmology.read()` is not implemented for `Cosmology` subclasses.";

/// Builds the read adapter for `class`.
///
/// Only the base `Cosmology` class supports reading. Any subclass gets a
/// single warning and [`ReadAccess::Unsupported`]; the registry is not touched.
///
/// # Arguments
///
/// * `registry` - The registry the adapter forwards to.
/// * `class` - The class the read is requested on.
///
/// # Return
///
/// Returns [`ReadAccess::Supported`] holding a [`CosmologyRead`] for the base
/// class, or [`ReadAccess::Unsupported`] for every subclass.
pub fn make_reader(registry: &UnifiedIoRegistry, class: CosmologyClass) -> ReadAccess<'_> {
    if !class.is_base() {
        warn!(class = %class, "{}", SUBCLASS_READ_WARNING);
        return ReadAccess::Unsupported(Unsupported {
            class,
            reason: SUBCLASS_READ_WARNING,
        });
    }
    ReadAccess::Supported(CosmologyRead { registry, class })
}

/// Builds the write adapter bound to `instance`.
///
/// Writing is available for every class and never warns.
///
/// # Arguments
///
/// * `registry` - The registry the adapter forwards to.
/// * `instance` - The cosmology every call of the adapter writes.
///
/// # Return
///
/// Returns a [`CosmologyWrite`] borrowing both arguments.
pub fn make_writer<'r, 'c>(
    registry: &'r UnifiedIoRegistry,
    instance: &'c Cosmology,
) -> CosmologyWrite<'r, 'c> {
    CosmologyWrite { registry, instance }
}

/// Reads a cosmology through the registry on behalf of the base class.
#[derive(Clone, Copy)]
pub struct CosmologyRead<'r> {
    registry: &'r UnifiedIoRegistry,
    class: CosmologyClass,
}

impl<'r> CosmologyRead<'r> {
    pub fn class(&self) -> CosmologyClass {
        self.class
    }

    pub fn instance(&self) -> Option<&Cosmology> {
        None
    }

    pub fn mode(&self) -> IoMode {
        IoMode::Read
    }

    /// Forwards `args` unchanged to the registry's read for the bound class.
    ///
    /// # Errors
    ///
    /// Returns whatever [`UnifiedIoRegistry::read`] returns, unchanged.
    pub fn call(&self, args: IoArgs) -> Result<Cosmology, IoError> {
        self.registry.read(self.class, &args)
    }

    /// Formats with a reader usable for the bound class, sorted by name.
    pub fn list_formats(&self) -> Vec<FormatInfo> {
        self.registry.formats(self.class, Some(IoMode::Read))
    }

    /// Help for reading: the format table, or one format's description.
    ///
    /// # Arguments
    ///
    /// * `format` - A format name, or `None` for the general listing.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnknownFormat`] if `format` has no reader for the bound class.
    pub fn help(&self, format: Option<&str>) -> Result<String, IoError> {
        self.registry.help(self.class, IoMode::Read, format)
    }
}

/// Writes one bound cosmology through the registry.
#[derive(Clone, Copy)]
pub struct CosmologyWrite<'r, 'c> {
    registry: &'r UnifiedIoRegistry,
    instance: &'c Cosmology,
}

impl<'r, 'c> CosmologyWrite<'r, 'c> {
    pub fn class(&self) -> CosmologyClass {
        self.instance.class()
    }

    pub fn instance(&self) -> Option<&'c Cosmology> {
        Some(self.instance)
    }

    pub fn mode(&self) -> IoMode {
        IoMode::Write
    }

    /// Forwards the bound instance and `args` unchanged to the registry's write.
    ///
    /// # Errors
    ///
    /// Returns whatever [`UnifiedIoRegistry::write`] returns, unchanged.
    pub fn call(&self, args: IoArgs) -> Result<(), IoError> {
        self.registry.write(self.instance, &args)
    }

    /// Formats with a writer usable for the bound instance's class.
    pub fn list_formats(&self) -> Vec<FormatInfo> {
        self.registry.formats(self.class(), Some(IoMode::Write))
    }

    pub fn help(&self, format: Option<&str>) -> Result<String, IoError> {
        self.registry.help(self.class(), IoMode::Write, format)
    }
}

impl CosmologyClass {
    /// `Class.read` accessor; see [`make_reader`].
    pub fn read(self, registry: &UnifiedIoRegistry) -> ReadAccess<'_> {
        make_reader(registry, self)
    }
}

impl Cosmology {
    /// `instance.write` accessor; see [`make_writer`].
    pub fn write<'r>(&self, registry: &'r UnifiedIoRegistry) -> CosmologyWrite<'r, '_> {
        make_writer(registry, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::registry::{RegisterOptions, RegistryBuilder};
    use crate::core::io::traits::{FormatReader, FormatWriter};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    #[derive(Clone, Default)]
    struct WarningCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarningCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn count_warnings<T>(f: impl FnOnce() -> T) -> (T, usize) {
        let counter = WarningCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        let out = tracing::subscriber::with_default(subscriber, f);
        (out, counter.0.load(Ordering::SeqCst))
    }

    type Calls = Arc<Mutex<Vec<(CosmologyClass, IoArgs)>>>;

    #[derive(Clone, Default)]
    struct SpyReader {
        calls: Calls,
    }

    impl FormatReader for SpyReader {
        fn read(&self, class: CosmologyClass, args: &IoArgs) -> Result<Cosmology, IoError> {
            self.calls.lock().unwrap().push((class, args.clone()));
            Ok(sample())
        }
    }

    #[derive(Clone, Default)]
    struct SpyWriter {
        calls: Arc<Mutex<Vec<(Cosmology, IoArgs)>>>,
    }

    impl FormatWriter for SpyWriter {
        fn write(&self, cosmology: &Cosmology, args: &IoArgs) -> Result<(), IoError> {
            self.calls
                .lock()
                .unwrap()
                .push((cosmology.clone(), args.clone()));
            Ok(())
        }
    }

    fn sample() -> Cosmology {
        Cosmology::builder(CosmologyClass::FlatLambdaCdm)
            .name("sample")
            .h0(70.0)
            .om0(0.3)
            .build()
            .unwrap()
    }

    fn spy_registry() -> (UnifiedIoRegistry, SpyReader, SpyWriter) {
        let reader = SpyReader::default();
        let writer = SpyWriter::default();
        let mut builder = RegistryBuilder::new();
        builder
            .register_reader(
                "spy",
                CosmologyClass::Cosmology,
                reader.clone(),
                RegisterOptions::default(),
            )
            .unwrap()
            .register_writer(
                "spy",
                CosmologyClass::Cosmology,
                writer.clone(),
                RegisterOptions::default(),
            )
            .unwrap();
        (builder.build(), reader, writer)
    }

    #[test]
    fn make_reader_for_base_class_is_supported_without_warning() {
        let (registry, _, _) = spy_registry();
        let (access, warnings) =
            count_warnings(|| make_reader(&registry, CosmologyClass::Cosmology));
        assert!(access.is_supported());
        assert_eq!(warnings, 0);
    }

    #[test]
    fn make_reader_for_every_subclass_warns_once_and_is_unsupported() {
        let (registry, reader, _) = spy_registry();
        for class in CosmologyClass::ALL.into_iter().filter(|c| !c.is_base()) {
            let (access, warnings) = count_warnings(|| make_reader(&registry, class));
            assert_eq!(warnings, 1, "class {}", class);
            match access {
                ReadAccess::Unsupported(unsupported) => assert_eq!(unsupported.class, class),
                ReadAccess::Supported(_) => panic!("{} should not be readable", class),
            }
        }
        assert!(reader.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn unsupported_read_converts_to_not_implemented() {
        let (registry, reader, _) = spy_registry();
        let err = CosmologyClass::FlatLambdaCdm
            .read(&registry)
            .into_result()
            .err()
            .unwrap();
        assert!(matches!(
            err,
            IoError::NotImplemented {
                class: CosmologyClass::FlatLambdaCdm
            }
        ));
        assert!(reader.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn read_forwards_arguments_verbatim() {
        let (registry, reader, _) = spy_registry();
        let args = IoArgs::path("file.ecsv")
            .arg(3i64)
            .with_format("spy")
            .option("index", 2usize)
            .option("move_to_meta", true);

        let got = CosmologyClass::Cosmology
            .read(&registry)
            .into_result()
            .unwrap()
            .call(args.clone())
            .unwrap();

        assert_eq!(got, sample());
        let calls = reader.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[(CosmologyClass::Cosmology, args)]);
    }

    #[test]
    fn read_returns_the_same_result_as_the_registry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.toml");
        let registry = UnifiedIoRegistry::with_builtin_formats().unwrap();
        registry
            .write(&sample(), &IoArgs::path(&path).with_format("toml"))
            .unwrap();

        let args = IoArgs::path(&path).with_format("toml");
        let direct = registry.read(CosmologyClass::Cosmology, &args).unwrap();
        let via_adapter = make_reader(&registry, CosmologyClass::Cosmology)
            .into_result()
            .unwrap()
            .call(args)
            .unwrap();
        assert_eq!(via_adapter, direct);
    }

    #[test]
    fn read_propagates_registry_errors_unchanged() {
        let (registry, _, _) = spy_registry();
        let reader = make_reader(&registry, CosmologyClass::Cosmology)
            .into_result()
            .unwrap();
        let err = reader
            .call(IoArgs::path("x.fits").with_format("fits"))
            .unwrap_err();
        assert!(matches!(err, IoError::UnknownFormat { .. }));
        let err = reader.call(IoArgs::path("x.fits")).unwrap_err();
        assert!(matches!(err, IoError::FormatNotIdentified { .. }));
    }

    #[test]
    fn write_forwards_instance_and_arguments_verbatim() {
        let (registry, _, writer) = spy_registry();
        let cosmo = sample();
        let args = IoArgs::path("out.dat")
            .with_format("spy")
            .option("overwrite", true);

        let adapter = cosmo.write(&registry);
        let () = adapter.call(args.clone()).unwrap();

        let calls = writer.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[(cosmo.clone(), args)]);
    }

    #[test]
    fn write_is_available_for_subclass_instances_without_warning() {
        let (registry, _, writer) = spy_registry();
        let cosmo = sample();
        let (result, warnings) = count_warnings(|| {
            make_writer(&registry, &cosmo).call(IoArgs::new().with_format("spy"))
        });
        assert!(result.is_ok());
        assert_eq!(warnings, 0);
        assert_eq!(writer.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn adapters_expose_their_bound_fields() {
        let (registry, _, _) = spy_registry();
        let reader = make_reader(&registry, CosmologyClass::Cosmology)
            .into_result()
            .unwrap();
        assert_eq!(reader.class(), CosmologyClass::Cosmology);
        assert!(reader.instance().is_none());
        assert_eq!(reader.mode(), IoMode::Read);

        let cosmo = sample();
        let writer = make_writer(&registry, &cosmo);
        assert_eq!(writer.class(), CosmologyClass::FlatLambdaCdm);
        assert_eq!(writer.instance(), Some(&cosmo));
        assert_eq!(writer.mode(), IoMode::Write);
    }

    #[test]
    fn adapters_delegate_format_listing_and_help() {
        let registry = UnifiedIoRegistry::with_builtin_formats().unwrap();
        let reader = make_reader(&registry, CosmologyClass::Cosmology)
            .into_result()
            .unwrap();
        let readable: Vec<_> = reader.list_formats().into_iter().map(|f| f.name).collect();
        assert_eq!(readable, vec!["ascii.csv", "json", "toml"]);
        assert!(reader.help(Some("json")).unwrap().contains("JSON"));

        let cosmo = sample();
        let writable = make_writer(&registry, &cosmo).list_formats();
        assert_eq!(writable.len(), 4);
        assert!(
            make_writer(&registry, &cosmo)
                .help(None)
                .unwrap()
                .starts_with("FlatLambdaCDM.write()")
        );
    }
}
