mod gateway;
mod helpers;
mod session;
mod transport;
