//! The shop's standard inventory.

use greenhouse_core::{PlantId, Price};

use crate::models::{CareLevel, Plant, PlantCategory};

struct Row {
    id: &'static str,
    name: &'static str,
    scientific_name: &'static str,
    category: PlantCategory,
    price: i64,
    original_price: Option<i64>,
    stock: u32,
    care_level: CareLevel,
    light: &'static str,
    size: &'static str,
    rating: f32,
    reviews: u32,
    featured: bool,
    description: &'static str,
}

const ROWS: &[Row] = &[
    Row {
        id: "monstera-deliciosa-swiss",
        name: "Swiss Cheese Plant",
        scientific_name: "Monstera deliciosa",
        category: PlantCategory::Indoor,
        price: 1299,
        original_price: Some(1599),
        stock: 18,
        care_level: CareLevel::Easy,
        light: "Bright indirect",
        size: "Large",
        rating: 4.8,
        reviews: 214,
        featured: true,
        description: "Iconic split leaves that fill a bright corner. Water when the top inch of soil is dry.",
    },
    Row {
        id: "snake-plant-laurentii",
        name: "Snake Plant Laurentii",
        scientific_name: "Dracaena trifasciata 'Laurentii'",
        category: PlantCategory::AirPurifying,
        price: 599,
        original_price: None,
        stock: 40,
        care_level: CareLevel::Easy,
        light: "Low to bright indirect",
        size: "Medium",
        rating: 4.7,
        reviews: 389,
        featured: true,
        description: "Upright yellow-edged leaves that tolerate neglect and low light.",
    },
    Row {
        id: "fiddle-leaf-fig",
        name: "Fiddle Leaf Fig",
        scientific_name: "Ficus lyrata",
        category: PlantCategory::Indoor,
        price: 1899,
        original_price: Some(2199),
        stock: 7,
        care_level: CareLevel::Moderate,
        light: "Bright indirect",
        size: "Large",
        rating: 4.5,
        reviews: 128,
        featured: true,
        description: "Glossy violin-shaped leaves on a single stem. Dislikes being moved.",
    },
    Row {
        id: "pothos-golden",
        name: "Golden Pothos",
        scientific_name: "Epipremnum aureum",
        category: PlantCategory::AirPurifying,
        price: 349,
        original_price: None,
        stock: 65,
        care_level: CareLevel::Easy,
        light: "Low to bright indirect",
        size: "Small",
        rating: 4.9,
        reviews: 502,
        featured: false,
        description: "Fast-growing trailing vine with marbled gold leaves.",
    },
    Row {
        id: "peace-lily",
        name: "Peace Lily",
        scientific_name: "Spathiphyllum wallisii",
        category: PlantCategory::Flowering,
        price: 499,
        original_price: None,
        stock: 25,
        care_level: CareLevel::Easy,
        light: "Medium indirect",
        size: "Medium",
        rating: 4.6,
        reviews: 277,
        featured: false,
        description: "White hooded blooms above dark leaves; droops visibly when thirsty.",
    },
    Row {
        id: "calathea-orbifolia",
        name: "Calathea Orbifolia",
        scientific_name: "Goeppertia orbifolia",
        category: PlantCategory::Indoor,
        price: 1099,
        original_price: None,
        stock: 0,
        care_level: CareLevel::Expert,
        light: "Medium indirect",
        size: "Medium",
        rating: 4.3,
        reviews: 61,
        featured: false,
        description: "Broad silver-striped leaves that need steady humidity and filtered water.",
    },
    Row {
        id: "string-of-pearls",
        name: "String of Pearls",
        scientific_name: "Curio rowleyanus",
        category: PlantCategory::Succulents,
        price: 449,
        original_price: None,
        stock: 3,
        care_level: CareLevel::Moderate,
        light: "Bright indirect",
        size: "Small",
        rating: 4.4,
        reviews: 93,
        featured: false,
        description: "Cascading strands of bead-like leaves for a hanging pot.",
    },
    Row {
        id: "echeveria-elegans",
        name: "Mexican Snowball",
        scientific_name: "Echeveria elegans",
        category: PlantCategory::Succulents,
        price: 249,
        original_price: Some(299),
        stock: 50,
        care_level: CareLevel::Easy,
        light: "Full sun",
        size: "Small",
        rating: 4.6,
        reviews: 158,
        featured: false,
        description: "Tight pale-blue rosettes that blush pink in strong light.",
    },
    Row {
        id: "bougainvillea-magenta",
        name: "Magenta Bougainvillea",
        scientific_name: "Bougainvillea glabra",
        category: PlantCategory::Outdoor,
        price: 699,
        original_price: None,
        stock: 20,
        care_level: CareLevel::Moderate,
        light: "Full sun",
        size: "Large",
        rating: 4.5,
        reviews: 87,
        featured: true,
        description: "Vigorous climber covered in papery magenta bracts through summer.",
    },
    Row {
        id: "hibiscus-red",
        name: "Red Hibiscus",
        scientific_name: "Hibiscus rosa-sinensis",
        category: PlantCategory::Flowering,
        price: 549,
        original_price: None,
        stock: 15,
        care_level: CareLevel::Moderate,
        light: "Full sun",
        size: "Medium",
        rating: 4.4,
        reviews: 112,
        featured: false,
        description: "Large crimson flowers that open daily in warm weather.",
    },
    Row {
        id: "areca-palm",
        name: "Areca Palm",
        scientific_name: "Dypsis lutescens",
        category: PlantCategory::AirPurifying,
        price: 1499,
        original_price: Some(1799),
        stock: 10,
        care_level: CareLevel::Moderate,
        light: "Bright indirect",
        size: "Large",
        rating: 4.6,
        reviews: 143,
        featured: true,
        description: "Feathery arching fronds that soften a living room.",
    },
    Row {
        id: "ceramic-planter-white",
        name: "Matte White Ceramic Planter",
        scientific_name: "Planter, 8 inch",
        category: PlantCategory::Planters,
        price: 899,
        original_price: None,
        stock: 30,
        care_level: CareLevel::Easy,
        light: "Any",
        size: "Medium",
        rating: 4.7,
        reviews: 76,
        featured: false,
        description: "Glazed inside, matte outside, with a drainage hole and saucer.",
    },
];

/// Build the seeded plant list.
pub(super) fn plants() -> Vec<Plant> {
    ROWS.iter()
        .map(|row| Plant {
            id: PlantId::new(row.id),
            name: row.name.to_owned(),
            scientific_name: row.scientific_name.to_owned(),
            category: row.category,
            price: Price::from_rupees(row.price),
            original_price: row.original_price.map(Price::from_rupees),
            description: row.description.to_owned(),
            image: format!("/images/plants/{}.jpg", row.id),
            in_stock: row.stock > 0,
            stock_quantity: row.stock,
            care_level: row.care_level,
            light: row.light.to_owned(),
            size: row.size.to_owned(),
            rating: row.rating,
            reviews: row.reviews,
            featured: row.featured,
        })
        .collect()
}
