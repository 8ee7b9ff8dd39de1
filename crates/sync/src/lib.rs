pub mod rwlock;
