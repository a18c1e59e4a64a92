use rand::Rng;

use catalog::{Catalog, City};

/// Every city is equally likely, and previous picks don't matter.
pub fn pick_destination<'a, R: Rng>(catalog: &'a Catalog, rng: &mut R) -> &'a City {
    // A catalog is never empty
    &catalog.cities()[rng.gen_range(0..catalog.len())]
}

pub fn random_destination(catalog: &Catalog) -> &City {
    pick_destination(catalog, &mut rand::thread_rng())
}
