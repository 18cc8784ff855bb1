//! Integration-style tests compiled with the binary.

mod cli_tests;
