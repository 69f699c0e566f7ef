//! Shared bus wiring several nodes together, with bit-time resolution.
use crate::node::Node;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use log::debug;

pub type NodeHandle = Rc<RefCell<Node>>;

/// Start bit, eight data bits and stop bit
pub const BITS_PER_BYTE: u32 = 10;

/// Low bit times of a break burst
pub const BREAK_BITS: u32 = 12;

#[derive(Debug)]
enum Payload {
    Frame(Vec<u8>),
    Break,
}

#[derive(Debug)]
struct Transmission {
    sender: usize,
    payload: Payload,
    remaining_bits: u32,
}

/// Half-duplex bus simulation.
///
/// One [tick](Self::tick) advances the bus by a single low-speed bit time.
/// The wire tracks idle time, opens the transmit permit window per node and
/// resolves same-window collisions by bit-wise arbitration: bits leave LSB
/// first and zero is dominant, so the node with the smallest reversed
/// source byte wins. Break bursts beat any frame.
#[derive(Debug, Default)]
pub struct Wire {
    nodes: Vec<NodeHandle>,
    line: Option<Transmission>,
    idle_bits: u32,
}

impl Wire {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects a node and returns the shared handle to it.
    pub fn attach(&mut self, node: Node) -> NodeHandle {
        let handle = Rc::new(RefCell::new(node));
        self.nodes.push(handle.clone());
        handle
    }

    /// Advances the bus by one bit time.
    pub fn tick(&mut self) {
        if self.line.is_some() {
            self.advance_transmission();
        } else {
            self.idle_bits += 1;
            self.update_idle_flags();
            self.arbitrate_start();
        }
    }

    /// Runs the given number of bit times.
    pub fn run(&mut self, bits: u32) {
        for _ in 0..bits {
            self.tick();
        }
    }

    fn advance_transmission(&mut self) {
        let sender_index = match &self.line {
            Some(t) => t.sender,
            None => return,
        };

        // An aborted sender releases the line mid-frame
        if !self.nodes[sender_index].borrow().is_transmitting() {
            debug!("Sender aborted, releasing the line");
            self.line = None;
            self.idle_bits = 0;
            return;
        }

        let done = match self.line.as_mut() {
            Some(t) => {
                t.remaining_bits -= 1;
                t.remaining_bits == 0
            }
            None => return,
        };

        if !done {
            return;
        }

        let transmission = match self.line.take() {
            Some(t) => t,
            None => return,
        };

        for (index, node) in self.nodes.iter().enumerate() {
            if index == transmission.sender {
                continue;
            }

            match &transmission.payload {
                Payload::Frame(raw) => node.borrow_mut().receive_frame(raw),
                Payload::Break => node.borrow_mut().receive_break(),
            }
        }

        let mut sender = self.nodes[transmission.sender].borrow_mut();
        match transmission.payload {
            Payload::Frame(_) => sender.complete_tx(),
            Payload::Break => sender.complete_break(),
        }

        self.idle_bits = 0;
    }

    fn update_idle_flags(&mut self) {
        for node in &self.nodes {
            let mut node = node.borrow_mut();
            let idle = self.idle_bits >= node.config().idle_wait_len as u32;
            node.set_bus_idle(idle);
        }
    }

    fn arbitrate_start(&mut self) {
        // (index, arbitration key, wants break) of every node whose permit
        // window is open this bit time
        let mut candidates: Vec<(usize, u8, bool)> = Vec::new();

        for (index, node) in self.nodes.iter().enumerate() {
            let node = node.borrow();

            if self.idle_bits < node.permit_threshold() {
                continue;
            }

            if node.wants_break() {
                candidates.push((index, 0x0, true));
            } else if node.wants_tx() {
                candidates.push((index, node.arbitration_key(), false));
            }
        }

        let winner = match candidates
            .iter()
            .min_by_key(|(index, key, is_break)| (!*is_break, *key, *index))
            .copied()
        {
            Some(winner) => winner,
            None => return,
        };

        let (winner_index, _, winner_break) = winner;

        // A break opening the window is not a collision for waiting frames
        if !winner_break {
            for (index, _, _) in &candidates {
                if *index != winner_index {
                    self.nodes[*index].borrow_mut().lose_arbitration();
                }
            }
        }

        let mut sender = self.nodes[winner_index].borrow_mut();
        let (payload, bits) = if winner_break {
            sender.begin_break();
            (Payload::Break, BREAK_BITS)
        } else {
            let raw = sender.begin_tx();
            let bits = raw.len() as u32 * BITS_PER_BYTE;
            (Payload::Frame(raw), bits)
        };
        drop(sender);

        debug!("Node {} takes the line", winner_index);

        for node in &self.nodes {
            node.borrow_mut().set_bus_idle(false);
        }

        self.line = Some(Transmission {
            sender: winner_index,
            payload,
            remaining_bits: bits,
        });
    }
}
