mod helpers;
mod library;
mod mocks;
mod orders;
