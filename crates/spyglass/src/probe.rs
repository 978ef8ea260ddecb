//! Object creation/destruction interception
//!
//! The probe reports every object created or destroyed on the current
//! thread to installed hooks. Inspection code that calls into a live object
//! holds a [`ProbeGuardSuspender`] for the duration of the call, so objects
//! the target creates on demand are not captured as new inspection targets.
//! Destruction is always reported, suspended or not.

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::object::{Object, ObjectId};

/// A lifecycle event seen by the probe.
#[derive(Debug)]
pub enum ProbeEvent<'a> {
    /// A new object finished construction
    Created(&'a Object),
    /// An object is being destroyed; it can no longer be upgraded
    Destroyed(ObjectId),
}

/// Observer of probe events
pub type ProbeHook = Rc<dyn Fn(&ProbeEvent<'_>)>;

/// Handle for removing an installed hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

static NEXT_HOOK_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static SUSPEND_DEPTH: Cell<usize> = const { Cell::new(0) };
    static HOOKS: RefCell<Vec<(HookId, ProbeHook)>> = const { RefCell::new(Vec::new()) };
}

/// Install a hook for this thread's objects.
pub fn install_hook<F>(hook: F) -> HookId
where
    F: Fn(&ProbeEvent<'_>) + 'static,
{
    let id = HookId(NEXT_HOOK_ID.fetch_add(1, Ordering::Relaxed));
    HOOKS.with(|hooks| hooks.borrow_mut().push((id, Rc::new(hook))));
    id
}

/// Remove a hook. Returns `false` if it was not installed.
pub fn remove_hook(id: HookId) -> bool {
    HOOKS.with(|hooks| {
        let mut hooks = hooks.borrow_mut();
        let before = hooks.len();
        hooks.retain(|(hook_id, _)| *hook_id != id);
        hooks.len() != before
    })
}

/// Check whether interception is currently suspended on this thread.
pub fn is_suspended() -> bool {
    suspend_depth() > 0
}

/// Number of live [`ProbeGuardSuspender`]s on this thread.
pub fn suspend_depth() -> usize {
    SUSPEND_DEPTH.with(Cell::get)
}

pub(crate) fn report(event: &ProbeEvent<'_>) {
    if matches!(event, ProbeEvent::Created(_)) && is_suspended() {
        trace!(?event, "probe suspended, event not reported");
        return;
    }
    // Objects dropped during thread teardown may outlive the hook table
    let hooks: Vec<ProbeHook> = match HOOKS.try_with(|hooks| {
        hooks
            .borrow()
            .iter()
            .map(|(_, hook)| Rc::clone(hook))
            .collect()
    }) {
        Ok(hooks) => hooks,
        Err(_) => return,
    };
    for hook in hooks {
        hook(event);
    }
}

/// RAII guard that suspends capture of new objects until dropped.
///
/// Guards nest: interception resumes when the outermost guard drops.
///
/// # Example
///
/// ```
/// use spyglass::probe::{self, ProbeGuardSuspender};
///
/// assert!(!probe::is_suspended());
/// {
///     let _outer = ProbeGuardSuspender::new();
///     let _inner = ProbeGuardSuspender::new();
///     assert_eq!(probe::suspend_depth(), 2);
/// }
/// assert!(!probe::is_suspended());
/// ```
pub struct ProbeGuardSuspender {
    // Depth is per thread; the guard must be released where it was taken
    _not_send: PhantomData<*const ()>,
}

impl ProbeGuardSuspender {
    /// Suspend interception.
    pub fn new() -> Self {
        SUSPEND_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Default for ProbeGuardSuspender {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProbeGuardSuspender {
    fn drop(&mut self) {
        let _ = SUSPEND_DEPTH.try_with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}
