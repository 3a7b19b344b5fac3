mod follow;
mod logger;
mod output;
