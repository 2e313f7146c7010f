// Communication channels lock-free

use crate::audio::voice::NoteEvent;
use crate::messaging::command::Command;
use ringbuf::{HeapRb, traits::Split};

pub type CommandProducer = ringbuf::HeapProd<Command>;
pub type CommandConsumer = ringbuf::HeapCons<Command>;

pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let rb = HeapRb::<Command>::new(capacity);
    rb.split()
}

pub type NoteProducer = ringbuf::HeapProd<NoteEvent>;
pub type NoteConsumer = ringbuf::HeapCons<NoteEvent>;

pub fn create_note_channel(capacity: usize) -> (NoteProducer, NoteConsumer) {
    let rb = HeapRb::<NoteEvent>::new(capacity);
    rb.split()
}
