//! Short alias for the `rinvoke` binary.

use rinvoke_cli::Argv;

fn main() {
    rinvoke_cli::program().run_or_exit(Argv::Process);
}
