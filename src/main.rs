use loadship::error::AppResult;

fn main() -> AppResult<()> {
    loadship::entry::run()
}
