pub mod event_reader;
pub mod forward_writer;
