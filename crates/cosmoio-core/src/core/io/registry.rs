use super::args::{IoArgs, IoMode};
use super::error::IoError;
use super::formats;
use super::traits::{FormatIdentifier, FormatReader, FormatWriter};
use crate::core::models::class::CosmologyClass;
use crate::core::models::cosmology::Cosmology;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, trace};

type Key = (String, CosmologyClass);

/// Options attached to a reader or writer registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Help text shown by [`UnifiedIoRegistry::help`].
    pub description: String,
    /// Breaks ties when several formats identify the same call; higher wins.
    pub priority: i32,
    /// Replace an existing registration instead of failing.
    pub force: bool,
}

impl RegisterOptions {
    /// Default options carrying `description`.
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }
}

struct HandlerEntry<H: ?Sized> {
    handler: Arc<H>,
    description: String,
    priority: i32,
}

/// One row of the format listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatInfo {
    pub name: String,
    pub read: bool,
    pub write: bool,
    pub auto_identify: bool,
    pub priority: i32,
    pub description: String,
}

/// Mutable registration phase of the unified I/O registry.
///
/// Format plugins register here at start-up; [`RegistryBuilder::build`]
/// freezes the result into a read-only [`UnifiedIoRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    readers: BTreeMap<Key, HandlerEntry<dyn FormatReader>>,
    writers: BTreeMap<Key, HandlerEntry<dyn FormatWriter>>,
    identifiers: BTreeMap<Key, Arc<dyn FormatIdentifier>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `reader` as the `format` reader for `class` and its subclasses.
    ///
    /// # Arguments
    ///
    /// * `format` - The name callers pass as `format`, e.g. `"ascii.csv"`.
    /// * `class` - The class the reader is registered for.
    /// * `reader` - The plugin that decodes the format.
    /// * `options` - Description, identification priority and `force`.
    ///
    /// # Return
    ///
    /// Returns the builder, so registrations can be chained.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::AlreadyRegistered`] if a reader for the same
    /// `(format, class)` exists and `options.force` is not set.
    pub fn register_reader(
        &mut self,
        format: &str,
        class: CosmologyClass,
        reader: impl FormatReader + 'static,
        options: RegisterOptions,
    ) -> Result<&mut Self, IoError> {
        let entry = HandlerEntry {
            handler: Arc::new(reader) as Arc<dyn FormatReader>,
            description: options.description,
            priority: options.priority,
        };
        insert_entry(&mut self.readers, "Reader", format, class, entry, options.force)?;
        Ok(self)
    }

    /// Registers `writer` as the `format` writer for `class` and its subclasses.
    ///
    /// # Arguments
    ///
    /// * `format` - The name callers pass as `format`.
    /// * `class` - The class the writer is registered for.
    /// * `writer` - The plugin that encodes the format.
    /// * `options` - Description, identification priority and `force`.
    ///
    /// # Return
    ///
    /// Returns the builder, so registrations can be chained.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::AlreadyRegistered`] if a writer for the same
    /// `(format, class)` exists and `options.force` is not set.
    pub fn register_writer(
        &mut self,
        format: &str,
        class: CosmologyClass,
        writer: impl FormatWriter + 'static,
        options: RegisterOptions,
    ) -> Result<&mut Self, IoError> {
        let entry = HandlerEntry {
            handler: Arc::new(writer) as Arc<dyn FormatWriter>,
            description: options.description,
            priority: options.priority,
        };
        insert_entry(&mut self.writers, "Writer", format, class, entry, options.force)?;
        Ok(self)
    }

    /// Registers the function that lets calls without a `format` resolve to `format`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::AlreadyRegistered`] if an identifier for the same
    /// `(format, class)` exists and `force` is not set.
    pub fn register_identifier(
        &mut self,
        format: &str,
        class: CosmologyClass,
        identifier: impl FormatIdentifier + 'static,
        force: bool,
    ) -> Result<&mut Self, IoError> {
        let identifier = Arc::new(identifier) as Arc<dyn FormatIdentifier>;
        insert_entry(
            &mut self.identifiers,
            "Identifier",
            format,
            class,
            identifier,
            force,
        )?;
        Ok(self)
    }

    /// Removes the `format` reader registered for exactly `class`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::NotRegistered`] if there is none. Readers inherited
    /// from an ancestor class are not removed.
    pub fn unregister_reader(
        &mut self,
        format: &str,
        class: CosmologyClass,
    ) -> Result<&mut Self, IoError> {
        remove_entry(&mut self.readers, "reader", format, class)?;
        Ok(self)
    }

    pub fn unregister_writer(
        &mut self,
        format: &str,
        class: CosmologyClass,
    ) -> Result<&mut Self, IoError> {
        remove_entry(&mut self.writers, "writer", format, class)?;
        Ok(self)
    }

    pub fn unregister_identifier(
        &mut self,
        format: &str,
        class: CosmologyClass,
    ) -> Result<&mut Self, IoError> {
        remove_entry(&mut self.identifiers, "identifier", format, class)?;
        Ok(self)
    }

    /// Freezes the registrations into a read-only, shareable registry.
    pub fn build(self) -> UnifiedIoRegistry {
        debug!(
            readers = self.readers.len(),
            writers = self.writers.len(),
            identifiers = self.identifiers.len(),
            "Unified I/O registry frozen."
        );
        UnifiedIoRegistry {
            readers: self.readers,
            writers: self.writers,
            identifiers: self.identifiers,
        }
    }
}

fn insert_entry<V>(
    map: &mut BTreeMap<Key, V>,
    kind: &'static str,
    format: &str,
    class: CosmologyClass,
    value: V,
    force: bool,
) -> Result<(), IoError> {
    let key = (format.to_string(), class);
    if !force && map.contains_key(&key) {
        return Err(IoError::AlreadyRegistered {
            kind,
            format: format.to_string(),
            class,
        });
    }
    trace!(kind, format, %class, "Registering format handler.");
    map.insert(key, value);
    Ok(())
}

fn remove_entry<V>(
    map: &mut BTreeMap<Key, V>,
    kind: &'static str,
    format: &str,
    class: CosmologyClass,
) -> Result<(), IoError> {
    map.remove(&(format.to_string(), class))
        .map(|_| ())
        .ok_or_else(|| IoError::NotRegistered {
            kind,
            format: format.to_string(),
            class,
        })
}

/// Read-only mapping of `(format, class)` pairs to readers, writers and identifiers.
///
/// A handler registered for a class also serves every subclass that has no
/// handler of its own for the same format.
pub struct UnifiedIoRegistry {
    readers: BTreeMap<Key, HandlerEntry<dyn FormatReader>>,
    writers: BTreeMap<Key, HandlerEntry<dyn FormatWriter>>,
    identifiers: BTreeMap<Key, Arc<dyn FormatIdentifier>>,
}

impl UnifiedIoRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// A registry populated with every format shipped in [`formats`].
    ///
    /// # Errors
    ///
    /// Returns an error only if two built-in formats claim the same name.
    pub fn with_builtin_formats() -> Result<Self, IoError> {
        let mut builder = RegistryBuilder::new();
        formats::register_builtin(&mut builder)?;
        Ok(builder.build())
    }

    /// Reads a cosmology of `class` using the format named in `args` or, when
    /// none is named, the one the registered identifiers agree on.
    ///
    /// # Arguments
    ///
    /// * `class` - The requested class. Readers registered for its ancestors apply.
    /// * `args` - Passed unchanged to the selected reader.
    ///
    /// # Return
    ///
    /// Returns the decoded cosmology, which is of `class` or one of its subclasses.
    ///
    /// # Errors
    ///
    /// Returns an error if the format cannot be resolved (see
    /// [`UnifiedIoRegistry::resolve_format`]), if no reader is registered for it
    /// ([`IoError::UnknownFormat`]), if the reader fails, or if the decoded
    /// instance belongs to an unrelated class ([`IoError::UnexpectedClass`]).
    pub fn read(&self, class: CosmologyClass, args: &IoArgs) -> Result<Cosmology, IoError> {
        let format = self.resolve_format(IoMode::Read, class, args)?;
        let entry = lookup(&self.readers, &format, class).ok_or_else(|| {
            self.unknown_format(IoMode::Read, class, &format)
        })?;
        debug!(format = %format, %class, "Dispatching read.");
        let cosmology = entry.handler.read(class, args)?;
        if !cosmology.class().is_subclass_of(class) {
            return Err(IoError::UnexpectedClass {
                expected: class,
                found: cosmology.class(),
            });
        }
        Ok(cosmology)
    }

    /// Writes `cosmology` with the writer registered for its class.
    ///
    /// # Arguments
    ///
    /// * `cosmology` - The instance to encode; its class selects the writer.
    /// * `args` - Passed unchanged to the selected writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the format cannot be resolved, no writer is
    /// registered for it, or the writer fails.
    pub fn write(&self, cosmology: &Cosmology, args: &IoArgs) -> Result<(), IoError> {
        let class = cosmology.class();
        let format = self.resolve_format(IoMode::Write, class, args)?;
        let entry = lookup(&self.writers, &format, class).ok_or_else(|| {
            self.unknown_format(IoMode::Write, class, &format)
        })?;
        debug!(format = %format, %class, "Dispatching write.");
        entry.handler.write(cosmology, args)
    }

    /// Formats usable for `class`, optionally restricted to one mode, sorted by name.
    pub fn formats(&self, class: CosmologyClass, mode: Option<IoMode>) -> Vec<FormatInfo> {
        let mut names = BTreeSet::new();
        for (name, owner) in self.readers.keys().chain(self.writers.keys()) {
            if class.is_subclass_of(*owner) {
                names.insert(name.clone());
            }
        }

        names
            .into_iter()
            .filter_map(|name| {
                let reader = lookup(&self.readers, &name, class);
                let writer = lookup(&self.writers, &name, class);
                let keep = match mode {
                    Some(IoMode::Read) => reader.is_some(),
                    Some(IoMode::Write) => writer.is_some(),
                    None => true,
                };
                if !keep {
                    return None;
                }
                let primary = match mode {
                    Some(IoMode::Write) => writer.map(|e| (e.priority, e.description.clone())),
                    _ => reader
                        .map(|e| (e.priority, e.description.clone()))
                        .or_else(|| writer.map(|e| (e.priority, e.description.clone()))),
                };
                let (priority, description) = primary.unwrap_or_default();
                Some(FormatInfo {
                    auto_identify: lookup(&self.identifiers, &name, class).is_some(),
                    read: reader.is_some(),
                    write: writer.is_some(),
                    name,
                    priority,
                    description,
                })
            })
            .collect()
    }

    /// Renders help for `class.<mode>()`: the format table, or the
    /// description of a single format.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnknownFormat`] if `format` names no handler for
    /// `class` in `mode`.
    pub fn help(
        &self,
        class: CosmologyClass,
        mode: IoMode,
        format: Option<&str>,
    ) -> Result<String, IoError> {
        let mut out = String::new();
        match format {
            Some(name) => {
                let description = match mode {
                    IoMode::Read => lookup(&self.readers, name, class).map(|e| &e.description),
                    IoMode::Write => lookup(&self.writers, name, class).map(|e| &e.description),
                }
                .ok_or_else(|| self.unknown_format(mode, class, name))?;
                let _ = writeln!(out, "{}.{}(format='{}') documentation", class, mode, name);
                let _ = writeln!(out, "{}", "-".repeat(40));
                let _ = writeln!(out, "{}", description);
            }
            None => {
                let rows = self.formats(class, Some(mode));
                let _ = writeln!(out, "{}.{}() general documentation", class, mode);
                let _ = writeln!(out, "{}", "-".repeat(40));
                let _ = writeln!(
                    out,
                    "The {} supports the following formats (pass `format=<name>`):",
                    mode.handler_noun()
                );
                let _ = writeln!(out);
                let _ = writeln!(out, "{}", render_format_table(&rows));
            }
        }
        Ok(out)
    }

    /// Names the format a call with `args` would dispatch to: the explicit
    /// `format`, else the identified format with the highest priority.
    ///
    /// # Arguments
    ///
    /// * `mode` - Whether readers or writers are considered.
    /// * `class` - The class whose handlers, and those of its ancestors, take part.
    /// * `args` - The call arguments shown to each identifier.
    ///
    /// # Return
    ///
    /// Returns the format name. An explicit `format` is returned as-is, even if
    /// nothing is registered under it.
    ///
    /// # Errors
    ///
    /// * [`IoError::FormatNotIdentified`] - no identifier recognised the call.
    /// * [`IoError::AmbiguousFormat`] - several formats share the highest priority.
    pub fn resolve_format(
        &self,
        mode: IoMode,
        class: CosmologyClass,
        args: &IoArgs,
    ) -> Result<String, IoError> {
        if let Some(format) = args.format() {
            return Ok(format.to_string());
        }

        let identified: Vec<String> = self
            .formats(class, Some(mode))
            .into_iter()
            .filter(|info| {
                lookup(&self.identifiers, &info.name, class)
                    .is_some_and(|identifier| identifier.identify(mode, args))
            })
            .map(|info| info.name)
            .collect();
        trace!(?identified, %class, %mode, "Identified candidate formats.");

        match identified.len() {
            0 => Err(IoError::FormatNotIdentified { class, mode }),
            1 => Ok(identified.into_iter().next().unwrap_or_default()),
            _ => {
                let priority = |name: &str| match mode {
                    IoMode::Read => lookup(&self.readers, name, class).map(|e| e.priority),
                    IoMode::Write => lookup(&self.writers, name, class).map(|e| e.priority),
                };
                let best = identified
                    .iter()
                    .filter_map(|name| priority(name.as_str()))
                    .max()
                    .unwrap_or_default();
                let mut winners: Vec<String> = identified
                    .into_iter()
                    .filter(|name| priority(name.as_str()) == Some(best))
                    .collect();
                if winners.len() == 1 {
                    Ok(winners.remove(0))
                } else {
                    winners.sort();
                    Err(IoError::AmbiguousFormat {
                        class,
                        mode,
                        candidates: winners,
                    })
                }
            }
        }
    }

    fn unknown_format(&self, mode: IoMode, class: CosmologyClass, format: &str) -> IoError {
        IoError::UnknownFormat {
            format: format.to_string(),
            class,
            mode,
            available: self
                .formats(class, Some(mode))
                .into_iter()
                .map(|info| info.name)
                .collect(),
        }
    }
}

/// Finds the handler registered for `class` or its nearest ancestor.
fn lookup<'a, V>(map: &'a BTreeMap<Key, V>, format: &str, class: CosmologyClass) -> Option<&'a V> {
    class
        .lineage()
        .find_map(|owner| map.get(&(format.to_string(), owner)))
}

fn render_format_table(rows: &[FormatInfo]) -> String {
    let headers = ["Format", "Read", "Write", "Auto-identify"];
    let width = rows
        .iter()
        .map(|r| r.name.len())
        .chain(std::iter::once(headers[0].len()))
        .max()
        .unwrap_or_default();
    let yes_no = |b: bool| if b { "Yes" } else { "No" };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$} {:>4} {:>5} {:>13}",
        headers[0],
        headers[1],
        headers[2],
        headers[3],
        width = width
    );
    let _ = write!(
        out,
        "{} {} {} {}",
        "-".repeat(width),
        "-".repeat(4),
        "-".repeat(5),
        "-".repeat(13)
    );
    for row in rows {
        let _ = write!(
            out,
            "\n{:<width$} {:>4} {:>5} {:>13}",
            row.name,
            yes_no(row.read),
            yes_no(row.write),
            yes_no(row.auto_identify),
            width = width
        );
    }
    out
}
