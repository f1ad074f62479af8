use super::BuildContext;
use std::fmt;

/// Reusable unit of build logic
///
/// A procedure appends instructions to a [`BuildContext`]. It must not keep
/// state about the contexts it has been applied to, so one value can be
/// executed against any number of builders.
pub trait Procedure {
    /// Short label used in logs
    fn name(&self) -> &str;

    /// Appends zero or more instructions to `context`
    fn apply(&self, context: &mut BuildContext);
}

impl<P: Procedure + ?Sized> Procedure for &P {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&self, context: &mut BuildContext) {
        (**self).apply(context)
    }
}

impl<P: Procedure + ?Sized> Procedure for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&self, context: &mut BuildContext) {
        (**self).apply(context)
    }
}

/// Procedure backed by a closure
pub struct FnProcedure<F> {
    name: String,
    body: F,
}

impl<F> FnProcedure<F>
where
    F: Fn(&mut BuildContext),
{
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

impl<F> Procedure for FnProcedure<F>
where
    F: Fn(&mut BuildContext),
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, context: &mut BuildContext) {
        (self.body)(context)
    }
}

impl<F> fmt::Debug for FnProcedure<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProcedure")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
