use aov_graph::GraphError;
use aov_graph::run;

fn main() -> Result<(), GraphError> {
    env_logger::init();
    run(std::env::args().collect())
}
