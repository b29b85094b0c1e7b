fn main() {
    uniboost::app::startup::startup();
}
