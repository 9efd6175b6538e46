fn main() {
    mpsl_lsp::server::run();
}
