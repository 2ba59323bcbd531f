fn main() {
    pollufight_lib::run()
}
