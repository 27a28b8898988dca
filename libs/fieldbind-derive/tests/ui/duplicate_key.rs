use fieldbind::Mapped;

#[derive(Mapped, Default)]
struct Twice {
    #[bind("k")]
    a: String,
    #[bind("k")]
    b: String,
}

fn main() {}
