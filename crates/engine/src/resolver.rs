//! Mapping "where" requests onto source locations
use crate::{Debugger, Location, SyncError};

/// Resolve `spec`, or the current point of execution when there is none
///
/// A spec the debugger cannot resolve directly falls back to the declaration
/// of the function of that name. When the request is confirmed to name a
/// function in the resolved file, the location is moved one line down, past
/// the declaration and into the body.
#[tracing::instrument(skip(debugger), level = "debug")]
pub fn resolve<D>(debugger: &D, spec: Option<&str>) -> Result<Location, SyncError>
where
    D: Debugger,
{
    let Some(spec) = spec else {
        return debugger.current_location();
    };

    let function = match debugger.function_location(spec) {
        Ok(function) => function,
        Err(e) => {
            tracing::debug!(error = %e, %spec, "function lookup failed");
            None
        }
    };

    let mut location = match debugger.resolve(spec) {
        Ok(location) => location,
        Err(e) => match &function {
            Some(function) => {
                tracing::debug!(error = %e, %spec, "falling back to function declaration");
                function.clone()
            }
            None => return Err(e),
        },
    };

    if let Some(function) = function {
        if function.same_file(&location) {
            location.line = function.line + 1;
        }
    }

    tracing::debug!(?location, "resolved location");
    Ok(location)
}
