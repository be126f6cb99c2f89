use std::time::{Duration, Instant};

type SettledFn<T> = Box<dyn FnMut(&T) + Send>;

/// Single-slot debouncer driven by caller-supplied clock readings.
///
/// Each `submit` replaces the pending value and restarts the quiescence
/// window. `poll` settles the value once the window has elapsed. Only the
/// latest value is retained.
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
    on_settled: Option<SettledFn<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self { Self { window, pending: None, on_settled: None } }

    pub fn window(&self) -> Duration { self.window }

    pub fn on_settled(&mut self, callback: impl FnMut(&T) + Send + 'static) {
        self.on_settled = Some(Box::new(callback));
    }

    pub fn submit(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    pub fn is_pending(&self) -> bool { self.pending.is_some() }

    pub fn deadline(&self) -> Option<Instant> { self.pending.as_ref().map(|(_, d)| *d) }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.flush(),
            _ => None,
        }
    }

    /// Settle the pending value immediately, ignoring the window.
    pub fn flush(&mut self) -> Option<T> {
        let (value, _) = self.pending.take()?;
        if let Some(cb) = self.on_settled.as_mut() { cb(&value); }
        Some(value)
    }

    pub fn cancel(&mut self) { self.pending = None; }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    const WINDOW: Duration = Duration::from_millis(300);

    #[test]
    fn nothing_settles_inside_the_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.submit("a", t0);
        assert_eq!(d.poll(t0 + Duration::from_millis(299)), None);
        assert_eq!(d.poll(t0 + WINDOW), Some("a"));
        assert_eq!(d.poll(t0 + WINDOW * 2), None);
    }

    #[test]
    fn resubmit_restarts_the_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.submit(1, t0);
        d.submit(2, t0 + Duration::from_millis(200));
        assert_eq!(d.poll(t0 + Duration::from_millis(400)), None);
        assert_eq!(d.poll(t0 + Duration::from_millis(500)), Some(2));
    }

    #[test]
    fn cancel_drops_pending_value() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.submit(1, t0);
        d.cancel();
        assert!(!d.is_pending());
        assert_eq!(d.poll(t0 + WINDOW), None);
    }

    proptest! {
        #[test]
        fn burst_yields_one_settle_with_last_value(
            gaps in proptest::collection::vec(0u64..300, 1..50),
        ) {
            let fired = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&fired);
            let mut d = Debouncer::new(WINDOW);
            d.on_settled(move |v: &usize| sink.lock().unwrap().push(*v));

            let t0 = Instant::now();
            let mut now = t0;
            for (i, gap) in gaps.iter().enumerate() {
                now += Duration::from_millis(*gap);
                prop_assert_eq!(d.poll(now), None);
                d.submit(i, now);
            }
            let mut tick = now;
            while tick <= now + WINDOW * 2 {
                let _ = d.poll(tick);
                tick += Duration::from_millis(50);
            }
            prop_assert_eq!(fired.lock().unwrap().clone(), vec![gaps.len() - 1]);
        }
    }
}
