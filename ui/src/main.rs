fn main() {
    walkabout::main();
}
