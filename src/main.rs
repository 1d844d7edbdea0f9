fn main() {
    cfd_gradients::cli::run();
}
