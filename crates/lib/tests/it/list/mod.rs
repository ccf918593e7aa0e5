mod concurrency;
mod manager;
