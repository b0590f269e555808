//! Loopback: Transmitter Into Receiver
//!
//! This example sends a few NEC frames from a transmitter straight into a
//! receive framer, with no hardware in between.
//!
//! Key concepts:
//! - Port traits implemented in software
//! - A `static` edge buffer fed the way an edge interrupt would feed it
//! - Polling both components from one loop
//! - Deriving timer settings from the config
//!
//! Run with: cargo run --example loopback

use embedded_hal::digital::{ErrorType, OutputPin};
use nec_node::config::NecConfig;
use nec_node::nec::{EdgeBuffer, EdgeTick, NecReceiver, NecTransmitter};
use nec_node::port::{MillisClock, TickTimer};
use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

static EDGES: EdgeBuffer = EdgeBuffer::new();

const CLOCK_HZ: u32 = 84_000_000;

#[derive(Clone, Default)]
struct Millis(Rc<Cell<u32>>);

impl MillisClock for Millis {
    fn now_millis(&self) -> u32 {
        self.0.get()
    }
}

/// Symbol timer that advances one tick per read.
#[derive(Clone, Default)]
struct SymbolTimer(Rc<Cell<u32>>);

impl TickTimer for SymbolTimer {
    fn start(&mut self) {
        self.0.set(0);
    }

    fn stop(&mut self) {}

    fn current_tick(&self) -> u32 {
        let now = self.0.get();
        self.0.set(now.wrapping_add(1));
        now
    }
}

struct CaptureTimer;

impl TickTimer for CaptureTimer {
    fn start(&mut self) {}

    fn stop(&mut self) {}

    fn current_tick(&self) -> u32 {
        0
    }
}

/// IR LED shining on a demodulating receiver: carrier on pulls its output
/// low, and each level change is handed to the edge buffer.
struct Link {
    ticks: Rc<Cell<u32>>,
}

impl ErrorType for Link {
    type Error = Infallible;
}

impl OutputPin for Link {
    fn set_low(&mut self) -> Result<(), Infallible> {
        EDGES.record_level(self.ticks.get() as EdgeTick, true);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        EDGES.record_level(self.ticks.get() as EdgeTick, false);
        Ok(())
    }
}

fn main() {
    println!("=== NEC Loopback ===\n");

    let config = NecConfig::from_json(r#"{ "tolerance_percent": 20 }"#).unwrap();

    let time_base = config.time_base();
    let pwm = config.pwm_setup(CLOCK_HZ);
    println!("Timer clock: {} Hz", CLOCK_HZ);
    println!(
        "  symbol timer reload: {} ({} us per tick)",
        time_base.reload_for_clock(CLOCK_HZ),
        time_base.tick_us
    );
    println!(
        "  carrier PWM: reload {}, compare {}\n",
        pwm.reload, pwm.compare
    );

    let clock = Millis::default();
    let symbol_timer = SymbolTimer::default();
    let link = Link {
        ticks: symbol_timer.0.clone(),
    };

    let mut rx = NecReceiver::new(clock.clone(), CaptureTimer, &EDGES, &config);
    let mut tx = NecTransmitter::new(symbol_timer, link, &config);

    rx.fire();
    println!("Receiver state: {:?}\n", rx.state());

    for code in [0x00FF_30CF, 0x00FF_18E7, 0x00FF_7A85] {
        tx.set_code(code);
        tx.fire();
        println!("Sent {:#010x} ({} edges captured)", code, EDGES.len());

        rx.fire();
        clock.0.set(clock.0.get() + config.message_timeout_ms + 1);
        rx.fire();

        let frame = rx.frame();
        println!(
            "  received {:#010x}: address {:#06x}, command {:?}",
            frame.code,
            frame.address(),
            frame.command()
        );
        rx.reset_code();
    }

    println!("\nRepetition code:");
    for tick in [100, 260, 300, 310] {
        EDGES.record(tick);
    }
    rx.fire();
    clock.0.set(clock.0.get() + config.message_timeout_ms + 1);
    rx.fire();
    println!("  is_repetition: {}", rx.is_repetition());

    let _ = rx.destroy();
    println!("\n=== Example Complete ===");
}
