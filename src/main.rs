use hpstress::error::AppResult;

fn main() -> AppResult<()> {
    hpstress::entry::run()
}
