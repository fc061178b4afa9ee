//! Immutable 40-space board layout and static lookup tables.
//!
//! Compiled into the binary; no I/O, no per-game mutable state. Grounded on
//! `original_source/backend/src/monopoly/engine/board.py`'s exact position
//! and price data.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::types::{
    ColorGroup, PropertyData, RailroadData, Space, SpaceType, TaxData, UtilityData,
};

pub const BOARD_SIZE: usize = 40;

fn properties() -> &'static HashMap<usize, PropertyData> {
    static CELL: OnceLock<HashMap<usize, PropertyData>> = OnceLock::new();
    CELL.get_or_init(|| {
        let mut m = HashMap::new();
        let entries: &[(usize, &'static str, ColorGroup, i64, i64, [i64; 6], i64)] = &[
            (1, "Mediterranean Avenue", ColorGroup::Brown, 60, 30, [2, 10, 30, 90, 160, 250], 50),
            (3, "Baltic Avenue", ColorGroup::Brown, 60, 30, [4, 20, 60, 180, 320, 450], 50),
            (6, "Oriental Avenue", ColorGroup::LightBlue, 100, 50, [6, 30, 90, 270, 400, 550], 50),
            (8, "Vermont Avenue", ColorGroup::LightBlue, 100, 50, [6, 30, 90, 270, 400, 550], 50),
            (9, "Connecticut Avenue", ColorGroup::LightBlue, 120, 60, [8, 40, 100, 300, 450, 600], 50),
            (11, "St. Charles Place", ColorGroup::Pink, 140, 70, [10, 50, 150, 450, 625, 750], 100),
            (13, "States Avenue", ColorGroup::Pink, 140, 70, [10, 50, 150, 450, 625, 750], 100),
            (14, "Virginia Avenue", ColorGroup::Pink, 160, 80, [12, 60, 180, 500, 700, 900], 100),
            (16, "St. James Place", ColorGroup::Orange, 180, 90, [14, 70, 200, 550, 750, 950], 100),
            (18, "Tennessee Avenue", ColorGroup::Orange, 180, 90, [14, 70, 200, 550, 750, 950], 100),
            (19, "New York Avenue", ColorGroup::Orange, 200, 100, [16, 80, 220, 600, 800, 1000], 100),
            (21, "Kentucky Avenue", ColorGroup::Red, 220, 110, [18, 90, 250, 700, 875, 1050], 150),
            (23, "Indiana Avenue", ColorGroup::Red, 220, 110, [18, 90, 250, 700, 875, 1050], 150),
            (24, "Illinois Avenue", ColorGroup::Red, 240, 120, [20, 100, 300, 750, 925, 1100], 150),
            (26, "Atlantic Avenue", ColorGroup::Yellow, 260, 130, [22, 110, 330, 800, 975, 1150], 150),
            (27, "Ventnor Avenue", ColorGroup::Yellow, 260, 130, [22, 110, 330, 800, 975, 1150], 150),
            (29, "Marvin Gardens", ColorGroup::Yellow, 280, 140, [24, 120, 360, 850, 1025, 1200], 150),
            (31, "Pacific Avenue", ColorGroup::Green, 300, 150, [26, 130, 390, 900, 1100, 1275], 200),
            (32, "North Carolina Avenue", ColorGroup::Green, 300, 150, [26, 130, 390, 900, 1100, 1275], 200),
            (34, "Pennsylvania Avenue", ColorGroup::Green, 320, 160, [28, 150, 450, 1000, 1200, 1400], 200),
            (37, "Park Place", ColorGroup::DarkBlue, 350, 175, [35, 175, 500, 1100, 1300, 1500], 200),
            (39, "Boardwalk", ColorGroup::DarkBlue, 400, 200, [50, 200, 600, 1400, 1700, 2000], 200),
        ];
        for &(position, name, color_group, price, mortgage_value, rent, house_cost) in entries {
            m.insert(
                position,
                PropertyData {
                    name,
                    position,
                    color_group,
                    price,
                    mortgage_value,
                    rent,
                    house_cost,
                },
            );
        }
        m
    })
}

fn railroads() -> &'static HashMap<usize, RailroadData> {
    static CELL: OnceLock<HashMap<usize, RailroadData>> = OnceLock::new();
    CELL.get_or_init(|| {
        let entries: &[(usize, &'static str)] = &[
            (5, "Reading Railroad"),
            (15, "Pennsylvania Railroad"),
            (25, "B&O Railroad"),
            (35, "Short Line Railroad"),
        ];
        entries
            .iter()
            .map(|&(position, name)| {
                (
                    position,
                    RailroadData {
                        name,
                        position,
                        price: 200,
                        mortgage_value: 100,
                    },
                )
            })
            .collect()
    })
}

fn utilities() -> &'static HashMap<usize, UtilityData> {
    static CELL: OnceLock<HashMap<usize, UtilityData>> = OnceLock::new();
    CELL.get_or_init(|| {
        let entries: &[(usize, &'static str)] = &[(12, "Electric Company"), (28, "Water Works")];
        entries
            .iter()
            .map(|&(position, name)| {
                (
                    position,
                    UtilityData {
                        name,
                        position,
                        price: 150,
                        mortgage_value: 75,
                    },
                )
            })
            .collect()
    })
}

fn taxes() -> &'static HashMap<usize, TaxData> {
    static CELL: OnceLock<HashMap<usize, TaxData>> = OnceLock::new();
    CELL.get_or_init(|| {
        HashMap::from([
            (4, TaxData { name: "Income Tax", position: 4, amount: 200 }),
            (38, TaxData { name: "Luxury Tax", position: 38, amount: 100 }),
        ])
    })
}

fn color_group_positions() -> &'static HashMap<ColorGroup, Vec<usize>> {
    static CELL: OnceLock<HashMap<ColorGroup, Vec<usize>>> = OnceLock::new();
    CELL.get_or_init(|| {
        HashMap::from([
            (ColorGroup::Brown, vec![1, 3]),
            (ColorGroup::LightBlue, vec![6, 8, 9]),
            (ColorGroup::Pink, vec![11, 13, 14]),
            (ColorGroup::Orange, vec![16, 18, 19]),
            (ColorGroup::Red, vec![21, 23, 24]),
            (ColorGroup::Yellow, vec![26, 27, 29]),
            (ColorGroup::Green, vec![31, 32, 34]),
            (ColorGroup::DarkBlue, vec![37, 39]),
        ])
    })
}

/// Railroad rent by count of unmortgaged railroads the owner holds.
pub fn railroad_rent(count_owned: usize) -> i64 {
    match count_owned {
        1 => 25,
        2 => 50,
        3 => 100,
        4 => 200,
        _ => 0,
    }
}

/// Utility rent multiplier by count of unmortgaged utilities the owner holds.
pub fn utility_multiplier(count_owned: usize) -> i64 {
    match count_owned {
        1 => 4,
        2 => 10,
        _ => 0,
    }
}

fn space_name_and_type(position: usize) -> (&'static str, SpaceType) {
    if let Some(p) = properties().get(&position) {
        return (p.name, SpaceType::Property);
    }
    if let Some(r) = railroads().get(&position) {
        return (r.name, SpaceType::Railroad);
    }
    if let Some(u) = utilities().get(&position) {
        return (u.name, SpaceType::Utility);
    }
    if let Some(t) = taxes().get(&position) {
        return (t.name, SpaceType::Tax);
    }
    match position {
        0 => ("GO", SpaceType::Go),
        2 | 17 | 33 => ("Community Chest", SpaceType::CommunityChest),
        7 | 22 | 36 => ("Chance", SpaceType::Chance),
        10 => ("Jail / Just Visiting", SpaceType::Jail),
        20 => ("Free Parking", SpaceType::FreeParking),
        30 => ("Go To Jail", SpaceType::GoToJail),
        _ => unreachable!("position {position} is not on the board"),
    }
}

/// Board is stateless; this zero-sized handle exists so call sites read
/// `Board::space(pos)` the way the engine's other components read `Rules`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Board;

impl Board {
    pub fn space(&self, position: usize) -> Space {
        let position = position % BOARD_SIZE;
        let (name, space_type) = space_name_and_type(position);
        Space { position, name, space_type }
    }

    pub fn property_data(&self, position: usize) -> Option<&'static PropertyData> {
        properties().get(&position)
    }

    pub fn railroad_data(&self, position: usize) -> Option<&'static RailroadData> {
        railroads().get(&position)
    }

    pub fn utility_data(&self, position: usize) -> Option<&'static UtilityData> {
        utilities().get(&position)
    }

    pub fn tax_data(&self, position: usize) -> Option<&'static TaxData> {
        taxes().get(&position)
    }

    pub fn color_group(&self, position: usize) -> Option<ColorGroup> {
        properties().get(&position).map(|p| p.color_group)
    }

    pub fn color_group_positions(&self, group: ColorGroup) -> &'static [usize] {
        color_group_positions()
            .get(&group)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_purchasable(&self, position: usize) -> bool {
        properties().contains_key(&position)
            || railroads().contains_key(&position)
            || utilities().contains_key(&position)
    }

    pub fn purchase_price(&self, position: usize) -> Option<i64> {
        if let Some(p) = properties().get(&position) {
            return Some(p.price);
        }
        if let Some(r) = railroads().get(&position) {
            return Some(r.price);
        }
        utilities().get(&position).map(|u| u.price)
    }

    /// `(to - from) mod 40`.
    pub fn distance(&self, from_pos: usize, to_pos: usize) -> usize {
        (to_pos + BOARD_SIZE - from_pos % BOARD_SIZE) % BOARD_SIZE
    }

    /// Next railroad strictly after `from_pos`, wrapping to the first.
    pub fn nearest_railroad(&self, from_pos: usize) -> usize {
        nearest(from_pos, &[5, 15, 25, 35])
    }

    /// Next utility strictly after `from_pos`, wrapping to the first.
    pub fn nearest_utility(&self, from_pos: usize) -> usize {
        nearest(from_pos, &[12, 28])
    }
}

fn nearest(from_pos: usize, positions: &[usize]) -> usize {
    let from_pos = from_pos % BOARD_SIZE;
    positions
        .iter()
        .copied()
        .find(|&p| p > from_pos)
        .unwrap_or(positions[0])
}
