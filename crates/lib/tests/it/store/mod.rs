mod accounts;
mod scoping;
