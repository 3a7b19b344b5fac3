mod channel;
mod envelope;
mod snapshot;
