//! `async_effect!`: build an [`Effect::Future`](crate::effect::Effect::Future)
//! without spelling out the pinning.
//!
//! Two forms are accepted:
//!
//! - a block, run as the body of an `async move` block and returning
//!   `Option<Action>`;
//! - `await call => |result| action`, where `call` is evaluated
//!   immediately (so it may borrow state) and the action is built from
//!   its output.

/// Create an `Effect::Future`
///
/// ```rust,ignore
/// use universal_booking_core::async_effect;
///
/// // Block form
/// async_effect! { Some(BookingAction::SubmissionRefused { correlation, reason }) }
///
/// // Call form: the backend call borrows `state` before the future is built
/// async_effect!(
///     await env.backend.get_categories(&state.request_context())
///         => |result| BookingAction::CategoriesLoaded { request, result }
/// )
/// ```
#[macro_export]
macro_rules! async_effect {
    (await $call:expr => |$output:ident| $action:expr) => {{
        let pending = $call;
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move {
            let $output = pending.await;
            ::std::option::Option::Some($action)
        }))
    }};
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move { $($body)* }))
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::effect::Effect;
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll, Waker};

    #[derive(Debug, PartialEq)]
    enum Seat {
        Held(u32),
        Refused,
    }

    /// Poll a future that is ready on first poll
    fn ready<A>(effect: Effect<A>) -> Option<A> {
        let Effect::Future(mut future) = effect else {
            return None;
        };
        match Pin::as_mut(&mut future).poll(&mut Context::from_waker(Waker::noop())) {
            Poll::Ready(output) => output,
            Poll::Pending => None,
        }
    }

    #[test]
    fn block_form_returns_its_action() {
        let effect = async_effect! { Some(Seat::Refused) };
        assert_eq!(ready(effect), Some(Seat::Refused));
    }

    #[test]
    fn call_form_wraps_the_output() {
        let seat = 12;
        let effect = async_effect!(await std::future::ready(seat) => |number| Seat::Held(number));
        assert_eq!(ready(effect), Some(Seat::Held(12)));
    }

    #[test]
    fn call_form_evaluates_the_call_before_the_future_runs() {
        let mut calls = 0;
        let effect = async_effect!(await {
            calls += 1;
            std::future::ready(calls)
        } => |n| Seat::Held(n));
        assert_eq!(calls, 1);
        assert_eq!(ready(effect).unwrap(), Seat::Held(1));
    }
}
