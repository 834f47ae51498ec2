fn main() {
    rampart::init();
    rampart::uci::run_uci_loop();
}
