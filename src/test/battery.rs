use crate::device::{Battery, DEFAULT_BASE_COST, DEFAULT_BATTERY_CAPACITY, EnergyModel};

#[test]
fn battery_defaults_to_full_capacity() {
    let b = Battery::default();
    assert_eq!(b.capacity(), DEFAULT_BATTERY_CAPACITY);
    assert!(!b.is_depleted());
}

#[test]
fn consume_subtracts_exactly() {
    let mut b = Battery::new(10.0);
    let energy = EnergyModel::new(0.25);
    let cost = energy.transfer_cost(3.0);
    b.consume(cost);
    assert_eq!(b.capacity(), 10.0 - 0.25 * 3.0);
}

#[test]
fn capacity_is_not_clamped_at_zero() {
    let mut b = Battery::new(1.0);
    b.consume(2.5);
    assert_eq!(b.capacity(), -1.5);
    assert!(b.is_depleted());
}

#[test]
fn default_energy_model_uses_base_cost() {
    let energy = EnergyModel::default();
    assert_eq!(energy.base_cost, DEFAULT_BASE_COST);
    assert_eq!(energy.transfer_cost(2.0), DEFAULT_BASE_COST * 2.0);
}
