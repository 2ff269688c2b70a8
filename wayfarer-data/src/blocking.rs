//! Bridge from the synchronous provider traits to async HTTP.

use std::future::Future;

use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

/// Build the single-threaded runtime each adapter owns.
pub(crate) fn owned_runtime() -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Drive `future` to completion from synchronous code.
///
/// Inside a multi-threaded Tokio runtime the caller's handle is used with
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime the
/// calling thread cannot start another runtime, so the adapter's own runtime
/// runs the future on a scoped helper thread while the caller blocks. With no
/// runtime at all the owned runtime runs it in place.
pub(crate) fn block_on<F>(runtime: &Runtime, future: F) -> F::Output
where
    F: Future + Send,
    F::Output: Send,
{
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| handle.block_on(future))
        }
        Ok(_) => std::thread::scope(|scope| {
            scope
                .spawn(|| runtime.block_on(future))
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
        }),
        Err(_) => runtime.block_on(future),
    }
}
