//! beanrec-extract - Extract transactions from bank statements.

fn main() -> std::process::ExitCode {
    beanrec::cmd::extract_cmd::main()
}
