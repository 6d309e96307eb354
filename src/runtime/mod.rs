//! Reference runtime boundary
//!
//! Design: the minimal host a registered procedure needs:
//! - A global namespace (`name → value`) in a concurrent map
//! - Registration of flat entry points under a name with their arity
//! - Arity-checked dispatch that lays out the call frame the adapters expect
//! - Scoped entry: one thread at a time, reentrant, released by a guard
//!
//! There is no evaluator; scripts are stood in for by [`Runtime::call`].

mod entry;
mod procedure;

pub use procedure::Procedure;

use crate::arity::Arity;
use crate::config::{Config, RuntimeConfig};
use crate::error::{BridgeError, BridgeResult};
use crate::logging;
use crate::marshal::{wrap, IntoDynResult, Subr};
use crate::signature::{Curried, OptionalArgs, RequiredArgs, RestArgs};
use crate::value::{DynValue, ToDyn};
use dashmap::DashMap;
use entry::EntryGuard;
use once_cell::sync::Lazy;
use parking_lot::ReentrantMutex;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-wide runtime used by [`with_runtime`]
static GLOBAL: Lazy<Runtime> =
    Lazy::new(|| Runtime::new(Config::discover().with_env_overrides().runtime));

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Frames up to this width stay on the stack
const INLINE_FRAME: usize = 8;

/// An embedded runtime instance
pub struct Runtime {
    id: u64,
    config: RuntimeConfig,
    globals: DashMap<Arc<str>, DynValue>,
    entry: ReentrantMutex<()>,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(target: "gsubr::runtime", runtime = id, ?config, "Runtime created");

        Self {
            id,
            config,
            globals: DashMap::with_capacity(64),
            entry: ReentrantMutex::new(()),
        }
    }

    /// The process-wide runtime, configured from `gsubr.toml` and the environment
    pub fn global() -> &'static Runtime {
        &GLOBAL
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Run `body` with permission to use this runtime
    ///
    /// Blocks while another thread is inside; nested entry from the same
    /// thread is allowed. The permission is released when `body` returns or
    /// unwinds, and `body`'s result is passed through unchanged.
    pub fn enter<R, F>(&self, body: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = EntryGuard::acquire(self.id, &self.entry);
        logging::log_runtime_enter(self.id, entry::depth(self.id));

        let result = body();

        logging::log_runtime_exit(self.id);
        result
    }

    /// Whether the current thread is inside this runtime
    pub fn is_entered(&self) -> bool {
        entry::is_entered(self.id)
    }

    fn ensure_entered(&self) -> BridgeResult<()> {
        if self.is_entered() {
            Ok(())
        } else {
            Err(BridgeError::NotEntered)
        }
    }

    /// Bind a flat entry point as a global procedure
    ///
    /// Returns the procedure value. An existing binding of `name` is replaced.
    pub fn define_gsubr(&self, name: &str, subr: Subr) -> BridgeResult<DynValue> {
        self.ensure_entered()?;

        let arity = subr.arity();
        if let Some(limit) = self.config.max_params {
            if arity.flat_len() > limit {
                return Err(BridgeError::ArityLimit {
                    name: name.to_string(),
                    arity,
                    limit,
                });
            }
        }

        let name: Arc<str> = Arc::from(name);
        let procedure = DynValue::procedure(Arc::new(Procedure::new(Arc::clone(&name), subr)));
        self.bind(name, procedure.clone(), Some(arity));

        Ok(procedure)
    }

    /// Wrap a curried native function and bind it under `name`
    pub fn define_curried<F, Req, Opt, Rest>(&self, name: &str, function: F) -> BridgeResult<DynValue>
    where
        F: Curried<Req, Opt, Rest> + Send + Sync + 'static,
        <F as Curried<Req, Opt, Rest>>::Output: IntoDynResult,
        Req: RequiredArgs,
        Opt: OptionalArgs,
        Rest: RestArgs,
    {
        self.define_gsubr(name, wrap(function))
    }

    /// Bind any value as a global variable
    pub fn define(&self, name: &str, value: impl ToDyn) -> BridgeResult<()> {
        self.ensure_entered()?;
        self.bind(Arc::from(name), value.to_dyn(), None);
        Ok(())
    }

    fn bind(&self, name: Arc<str>, value: DynValue, arity: Option<Arity>) {
        let previous = self.globals.insert(Arc::clone(&name), value);

        match previous {
            Some(previous) if self.config.warn_on_redefine => {
                logging::log_subr_redefined(&name, &previous, arity);
            }
            _ => {
                if let Some(arity) = arity {
                    logging::log_subr_defined(&name, arity);
                }
            }
        }
    }

    /// Value bound to `name`
    pub fn lookup(&self, name: &str) -> BridgeResult<DynValue> {
        self.ensure_entered()?;
        self.globals
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BridgeError::UnboundVariable {
                name: name.to_string(),
            })
    }

    pub fn is_defined(&self, name: &str) -> BridgeResult<bool> {
        self.ensure_entered()?;
        Ok(self.globals.contains_key(name))
    }

    /// All global names, sorted
    pub fn names(&self) -> BridgeResult<Vec<String>> {
        self.ensure_entered()?;
        let mut names: Vec<String> = self.globals.iter().map(|entry| entry.key().to_string()).collect();
        names.sort();
        Ok(names)
    }

    /// Apply a procedure value to positional arguments
    ///
    /// The argument count is checked against the procedure's arity before
    /// its entry point runs. The frame handed to the entry point holds the
    /// required arguments, the supplied optionals padded with the undefined
    /// sentinel, and for rest arities a list of whatever is left.
    pub fn apply(&self, procedure: &DynValue, args: &[DynValue]) -> BridgeResult<DynValue> {
        self.ensure_entered()?;

        let procedure = procedure.as_procedure().ok_or(BridgeError::NotCallable {
            found: procedure.kind(),
        })?;
        let arity = procedure.arity();

        let parts = match arity.partition(args.len()) {
            Some(parts) => parts,
            None => {
                logging::log_arity_mismatch(procedure.name(), arity, args.len());
                return Err(BridgeError::ArityMismatch {
                    name: procedure.name().to_string(),
                    arity,
                    supplied: args.len(),
                });
            }
        };

        logging::log_subr_call(procedure.name(), args.len());

        let (required, optional, rest) = parts.split(args);
        let mut frame: SmallVec<[DynValue; INLINE_FRAME]> = SmallVec::with_capacity(arity.flat_len());
        frame.extend(required.iter().cloned());
        frame.extend(optional.iter().cloned());
        frame.extend(std::iter::repeat(DynValue::undefined()).take(parts.missing_optional()));
        if arity.rest {
            frame.push(DynValue::list(rest.iter().cloned()));
        }

        procedure.subr().invoke(&frame)
    }

    /// Look up a global procedure and apply it
    pub fn call(&self, name: &str, args: &[DynValue]) -> BridgeResult<DynValue> {
        let procedure = self.lookup(name)?;
        self.apply(&procedure, args)
    }

    /// Call with native arguments
    pub fn call_with<I, T>(&self, name: &str, args: I) -> BridgeResult<DynValue>
    where
        I: IntoIterator<Item = T>,
        T: ToDyn,
    {
        let args: SmallVec<[DynValue; INLINE_FRAME]> = args.into_iter().map(ToDyn::to_dyn).collect();
        self.call(name, &args)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("id", &self.id)
            .field("globals", &self.globals.len())
            .finish()
    }
}

/// Run `body` inside the process-wide runtime
///
/// ```
/// use gsubr::{with_runtime, Runtime};
///
/// let defined = with_runtime(|| Runtime::global().is_defined("no-such-thing"));
/// assert!(!defined.unwrap());
///
/// // results of any type pass through, including `()`
/// let () = with_runtime(|| ());
/// ```
pub fn with_runtime<R, F>(body: F) -> R
where
    F: FnOnce() -> R,
{
    Runtime::global().enter(body)
}

#[cfg(test)]
mod tests;
