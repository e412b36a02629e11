use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use signal_intercept_core::RoundGeneration;
use signal_intercept_system_transmission::{
    Dispatch, MessageDelivery, MessageSource, TransmissionError, Uplink, FALLBACK_MESSAGES,
};

struct Rejecting;

impl MessageSource for Rejecting {
    fn fetch(&self) -> Result<String, TransmissionError> {
        Err(TransmissionError::Service("connection refused".to_owned()))
    }
}

struct Scripted {
    replies: Vec<&'static str>,
    calls: AtomicUsize,
}

impl MessageSource for Scripted {
    fn fetch(&self) -> Result<String, TransmissionError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.replies[index % self.replies.len()].to_owned())
    }
}

fn wait_for(uplink: &Uplink, count: usize) -> Vec<MessageDelivery> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut deliveries = Vec::new();
    while deliveries.len() < count && Instant::now() < deadline {
        deliveries.extend(uplink.poll());
        thread::sleep(Duration::from_millis(1));
    }
    deliveries
}

#[test]
fn failing_source_always_delivers_a_fallback_phrase() {
    let mut uplink = Uplink::new(Arc::new(Rejecting), Dispatch::Inline, 17);

    for value in 1..=50 {
        uplink.request(RoundGeneration::new(value));
    }
    let deliveries = uplink.poll();

    assert_eq!(deliveries.len(), 50);
    for (index, delivery) in deliveries.iter().enumerate() {
        assert_eq!(delivery.generation.get(), index as u64 + 1);
        assert!(FALLBACK_MESSAGES.contains(&delivery.text.as_str()));
    }
}

#[test]
fn blank_replies_fall_back() {
    let source = Scripted {
        replies: vec!["   "],
        calls: AtomicUsize::new(0),
    };
    let mut uplink = Uplink::new(Arc::new(source), Dispatch::Inline, 2);

    uplink.request(RoundGeneration::new(4));

    let deliveries = uplink.poll();
    assert_eq!(deliveries.len(), 1);
    assert!(FALLBACK_MESSAGES.contains(&deliveries[0].text.as_str()));
}

#[test]
fn successful_replies_are_normalised() {
    let source = Scripted {
        replies: vec!["  meet at the old bridge. "],
        calls: AtomicUsize::new(0),
    };
    let mut uplink = Uplink::new(Arc::new(source), Dispatch::Inline, 2);

    uplink.request(RoundGeneration::new(9));

    assert_eq!(
        uplink.poll(),
        vec![MessageDelivery {
            generation: RoundGeneration::new(9),
            text: "MEET AT THE OLD BRIDGE.".to_owned(),
        }]
    );
}

#[test]
fn fallback_selection_is_seeded() {
    let collect = |seed| {
        let mut uplink = Uplink::offline(seed);
        for value in 0..20 {
            uplink.request(RoundGeneration::new(value));
        }
        uplink
            .poll()
            .into_iter()
            .map(|delivery| delivery.text)
            .collect::<Vec<_>>()
    };

    assert_eq!(collect(42), collect(42));
}

#[test]
fn threaded_requests_arrive_without_blocking_the_caller() {
    let mut uplink = Uplink::new(Arc::new(Rejecting), Dispatch::Threaded, 8);

    uplink.request(RoundGeneration::new(1));
    uplink.request(RoundGeneration::new(2));
    let mut deliveries = wait_for(&uplink, 2);
    deliveries.sort_by_key(|delivery| delivery.generation);

    assert_eq!(deliveries.len(), 2);
    assert_eq!(deliveries[0].generation, RoundGeneration::new(1));
    assert_eq!(deliveries[1].generation, RoundGeneration::new(2));
}
